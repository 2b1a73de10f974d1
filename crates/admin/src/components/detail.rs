//! Outcome of loading one record for a detail page.

/// What a detail page renders.
#[derive(Debug, Clone)]
pub enum Detail<E> {
    Found(E),
    /// The API has no such record.
    NotFound,
    /// The fetch failed; the message is operator-facing.
    Failed(String),
}

impl<E> From<Result<Option<E>, String>> for Detail<E> {
    /// Interpret the outcome of this request's own `fetch_one`.
    fn from(outcome: Result<Option<E>, String>) -> Self {
        match outcome {
            Ok(Some(record)) => Self::Found(record),
            Ok(None) => Self::NotFound,
            Err(message) => Self::Failed(message),
        }
    }
}

impl<E> Detail<E> {
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use tojumi_core::StudentId;

    use super::*;
    use crate::api::Student;

    #[test]
    fn test_detail_outcomes() {
        let student = Student {
            id: StudentId::new("s1"),
            ..Student::default()
        };
        assert!(Detail::from(Ok::<_, String>(Some(student))).is_found());
        assert!(matches!(Detail::from(Ok::<Option<Student>, String>(None)), Detail::NotFound));
        assert!(matches!(
            Detail::from(Err::<Option<Student>, _>("Failed to load student details".to_string())),
            Detail::Failed(message) if message == "Failed to load student details"
        ));
    }
}
