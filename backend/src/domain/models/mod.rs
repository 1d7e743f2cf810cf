pub mod challan;
pub mod report;
pub mod student;

pub use challan::*;
pub use report::*;
pub use student::*;
