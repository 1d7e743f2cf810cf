use shared::PromoteRequest;

use super::parse_class;
use crate::domain::commands::promotion::PromoteCommand;
use crate::domain::LedgerResult;

pub struct PromotionMapper;

impl PromotionMapper {
    pub fn to_command(request: PromoteRequest) -> LedgerResult<PromoteCommand> {
        Ok(PromoteCommand {
            student_ids: request.student_ids,
            current_class: parse_class(&request.current_class)?,
            allow_override: request.allow_override,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ClassLevel;

    #[test]
    fn test_promote_request_parses_class() {
        let command = PromotionMapper::to_command(PromoteRequest {
            student_ids: vec![3],
            current_class: "O-Level".to_string(),
            allow_override: false,
        })
        .unwrap();
        assert_eq!(command.current_class, ClassLevel::OLevel);
        assert!(!command.allow_override);

        let err = PromotionMapper::to_command(PromoteRequest {
            student_ids: vec![3],
            current_class: "Grade 11".to_string(),
            allow_override: false,
        });
        assert!(err.is_err());
    }
}
