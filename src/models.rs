//! Domain models for the two kinds of language-learning resources. Rows come
//! out of the `resources` table joined with either `classes` or `exams`, and
//! get hydrated into one of the variants below. Every constructor validates
//! its invariants up front so a value that exists is always a valid one.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Lowest rating a class may carry (inclusive).
pub const MIN_RATING: u8 = 1;
/// Highest rating a class may carry (inclusive).
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Discriminator stored in `resources.type`. The derived ordering matches the
/// SQL ordering of the tags, classes before exams.
pub enum ResourceKind {
    /// A taught class; detail row lives in `classes`.
    Class,
    /// An exam; detail row lives in `exams`.
    Exam,
}

impl ResourceKind {
    /// Tag as written in the `type` column.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Exam => "exam",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "class" => Ok(Self::Class),
            "exam" => Ok(Self::Exam),
            other => Err(Error::validation(format!(
                "unsupported resource type '{other}', expected 'class' or 'exam'"
            ))),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The three exam formats the catalogue knows about. The stored labels are
/// the Spanish ones used by the dataset; English aliases are accepted when
/// parsing.
pub enum ExamKind {
    /// Multiple choice (`selección`).
    Selection,
    /// Open question and answer (`pregunta y respuesta`).
    QuestionAnswer,
    /// Fill in the blanks (`completación`).
    Completion,
}

impl ExamKind {
    /// Every kind, in the order error messages list them.
    pub const ALL: [ExamKind; 3] = [Self::Selection, Self::QuestionAnswer, Self::Completion];

    /// Label as stored in `exams.exam_type` and shown to the user.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Selection => "selección",
            Self::QuestionAnswer => "pregunta y respuesta",
            Self::Completion => "completación",
        }
    }

    const fn alias(self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::QuestionAnswer => "question-answer",
            Self::Completion => "completion",
        }
    }
}

impl FromStr for ExamKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == value || kind.alias() == value)
            .ok_or_else(|| {
                let accepted = Self::ALL.map(ExamKind::label).join(", ");
                Error::validation(format!("invalid exam type '{value}', use one of: {accepted}"))
            })
    }
}

impl fmt::Display for ExamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A language class with its quality rating.
pub struct ClassResource {
    /// Primary key from `resources`.
    id: i64,
    /// Display name, never blank.
    name: String,
    /// Quality rating within `MIN_RATING..=MAX_RATING`.
    rating: u8,
}

impl ClassResource {
    /// Build a class, rejecting ratings outside `MIN_RATING..=MAX_RATING`.
    pub fn new(id: i64, name: impl Into<String>, rating: i64) -> Result<Self> {
        let name = checked_identity(id, name.into())?;
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .ok_or_else(|| {
                Error::validation(format!(
                    "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
                ))
            })?;

        Ok(Self { id, name, rating })
    }

    /// Storage id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Name shown in results.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rating between 1 and 5.
    pub fn rating(&self) -> u8 {
        self.rating
    }
}

impl fmt::Display for ClassResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Clase: {} | {}/{}", self.name, self.rating, MAX_RATING)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A language exam and its format.
pub struct ExamResource {
    /// Primary key from `resources`.
    id: i64,
    /// Display name, never blank.
    name: String,
    /// Format parsed from `exams.exam_type`.
    exam_kind: ExamKind,
}

impl ExamResource {
    /// Build an exam from the raw `exam_type` text.
    pub fn new(id: i64, name: impl Into<String>, exam_type: &str) -> Result<Self> {
        let name = checked_identity(id, name.into())?;
        let exam_kind = exam_type.parse()?;
        Ok(Self {
            id,
            name,
            exam_kind,
        })
    }

    /// Storage id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Name shown in results.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exam format.
    pub fn exam_kind(&self) -> ExamKind {
        self.exam_kind
    }
}

impl fmt::Display for ExamResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Examen: {} | Tipo: {}", self.name, self.exam_kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A hydrated search result. The variant is fixed by the row's `type` column.
pub enum Resource {
    /// Row with `type = 'class'` and its rating.
    Class(ClassResource),
    /// Row with `type = 'exam'` and its exam format.
    Exam(ExamResource),
}

impl Resource {
    /// Storage id, shared by both variants.
    pub fn id(&self) -> i64 {
        match self {
            Self::Class(class) => class.id(),
            Self::Exam(exam) => exam.id(),
        }
    }

    /// Resource name as stored.
    pub fn name(&self) -> &str {
        match self {
            Self::Class(class) => class.name(),
            Self::Exam(exam) => exam.name(),
        }
    }

    /// Which variant this is, as the storage tag.
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Class(_) => ResourceKind::Class,
            Self::Exam(_) => ResourceKind::Exam,
        }
    }

    /// Ready-to-print line for this resource.
    pub fn display(&self) -> String {
        self.to_string()
    }

    /// In-memory counterpart of the SQL filter: yields `self` when `term`
    /// appears in the name, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&Self> {
        if self.name().to_lowercase().contains(&term.to_lowercase()) {
            vec![self]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => class.fmt(f),
            Self::Exam(exam) => exam.fmt(f),
        }
    }
}

impl From<ClassResource> for Resource {
    fn from(class: ClassResource) -> Self {
        Self::Class(class)
    }
}

impl From<ExamResource> for Resource {
    fn from(exam: ExamResource) -> Self {
        Self::Exam(exam)
    }
}

fn checked_identity(id: i64, name: String) -> Result<String> {
    if id <= 0 {
        return Err(Error::validation(format!(
            "resource id must be positive, got {id}"
        )));
    }
    if name.trim().is_empty() {
        return Err(Error::validation("resource name must not be empty"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(ClassResource::new(1, "Intro", 1).is_ok());
        assert!(ClassResource::new(1, "Intro", 5).is_ok());

        for rating in [-1, 0, 6, 255, 256] {
            let err = ClassResource::new(1, "Intro", rating).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "rating {rating}");
            assert!(err.to_string().contains("between 1 and 5"));
        }
    }

    #[test]
    fn exam_kind_accepts_labels_and_aliases() {
        assert_eq!("selección".parse::<ExamKind>().unwrap(), ExamKind::Selection);
        assert_eq!(
            "pregunta y respuesta".parse::<ExamKind>().unwrap(),
            ExamKind::QuestionAnswer
        );
        assert_eq!("completion".parse::<ExamKind>().unwrap(), ExamKind::Completion);

        let err = ExamResource::new(2, "Final", "oral").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("completación"));
    }

    #[test]
    fn unknown_resource_type_is_rejected() {
        let err = "workshop".parse::<ResourceKind>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!("exam".parse::<ResourceKind>().unwrap(), ResourceKind::Exam);
    }

    #[test]
    fn identity_is_checked() {
        assert!(ClassResource::new(0, "Intro", 3).is_err());
        assert!(ExamResource::new(3, "   ", "selección").is_err());
    }

    #[test]
    fn display_formats() {
        let class: Resource = ClassResource::new(1, "English Advanced Class", 5)
            .unwrap()
            .into();
        let exam: Resource = ExamResource::new(2, "Spanish Basic Exam", "selection")
            .unwrap()
            .into();

        assert_eq!(class.display(), "Clase: English Advanced Class | 5/5");
        assert_eq!(exam.display(), "Examen: Spanish Basic Exam | Tipo: selección");
        assert_eq!(class.display(), class.display());
        assert_eq!(class.kind(), ResourceKind::Class);
        assert_eq!(exam.id(), 2);
    }

    #[test]
    fn search_is_case_insensitive() {
        let exam: Resource = ExamResource::new(2, "Spanish Basic Exam", "completación")
            .unwrap()
            .into();

        assert_eq!(exam.search("BASIC"), vec![&exam]);
        assert!(exam.search("french").is_empty());
    }
}
