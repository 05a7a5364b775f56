use std::fmt;

/// A question/answer record with a store-assigned integer identity.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Quiz {
    id: i64,
    question: String,
    answer: String,
}

impl fmt::Display for Quiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} => {}", self.id, self.question, self.answer)
    }
}

impl Quiz {
    /// Rebuilds a record already persisted by the store.
    pub(crate) fn retrieve(id: i64, question: String, answer: String) -> Self {
        Self {
            id,
            question,
            answer,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn set_question(&mut self, question: String) {
        self.question = question;
    }

    pub fn set_answer(&mut self, answer: String) {
        self.answer = answer;
    }
}
