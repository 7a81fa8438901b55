use thiserror::Error;

/// 牌面字符串无法解析
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("card token {token:?} has {len} characters, expected 2 or 3")]
    InvalidLength { token: String, len: usize },

    #[error("card token {token:?} has unknown rank marker {marker:?}")]
    UnknownRank { token: String, marker: String },

    #[error("card token {token:?} has unknown suit {glyph:?}")]
    UnknownSuit { token: String, glyph: char },
}

/// 牌都能解析，但组成的一手牌不合法
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a hand needs at least 5 cards, got {got}")]
    TooFewCards { got: usize },

    #[error("card {0} appears more than once in the hand")]
    DuplicateCard(String),
}

/// 评估一手牌时可能出现的所有错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_token() {
        let err = ParseError::UnknownSuit { token: "Ax".to_string(), glyph: 'x' };
        assert!(err.to_string().contains("\"Ax\""));

        let err = ValidationError::DuplicateCard("K♠".to_string());
        assert_eq!(err.to_string(), "card K♠ appears more than once in the hand");
    }

    #[test]
    fn test_hand_error_is_transparent() {
        let err: HandError = ValidationError::TooFewCards { got: 3 }.into();
        assert_eq!(err.to_string(), "a hand needs at least 5 cards, got 3");
        assert!(matches!(err, HandError::Validation(ValidationError::TooFewCards { got: 3 })));
    }
}
