// Record trait and the student record type

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use std::str::FromStr;

/// Core trait that any record kept in a [`RecordStore`](crate::RecordStore) must implement
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Form payload a full record is built from
    type Fields;

    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Fixed key under which the whole collection is persisted
    fn storage_key() -> &'static str
    where
        Self: Sized;

    /// Build a complete record carrying `id` and the given field values
    fn from_fields(id: String, fields: Self::Fields) -> Self;
}

/// One student entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub age: String,
    pub grade: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Copy of this record's editable fields
    pub fn form(&self) -> StudentForm {
        StudentForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            age: self.age.clone(),
            grade: self.grade.clone(),
        }
    }
}

impl Record for Student {
    type Fields = StudentForm;

    fn id(&self) -> &str {
        &self.id
    }

    fn storage_key() -> &'static str {
        "students"
    }

    fn from_fields(id: String, fields: StudentForm) -> Self {
        Self {
            id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            age: fields.age,
            grade: fields.grade,
        }
    }
}

/// Editable fields of a student, as typed into the add/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: String,
    pub grade: String,
}

impl StudentForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Age => &self.age,
            FormField::Grade => &self.grade,
        }
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Age => &mut self.age,
            FormField::Grade => &mut self.grade,
        };
        *slot = value.into();
    }

    /// First required field left empty, in form order
    pub fn missing_required(&self) -> Option<FormField> {
        FormField::ALL
            .into_iter()
            .filter(|f| f.is_required())
            .find(|f| self.get(*f).is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Fields of the student form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Age,
    Grade,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Age,
        FormField::Grade,
    ];

    pub fn is_required(self) -> bool {
        !matches!(self, FormField::LastName)
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::Email => "Email",
            FormField::Age => "Age",
            FormField::Grade => "Grade",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "firstname" | "first" | "name" => Ok(FormField::FirstName),
            "lastname" | "last" => Ok(FormField::LastName),
            "email" => Ok(FormField::Email),
            "age" => Ok(FormField::Age),
            "grade" => Ok(FormField::Grade),
            other => Err(format!("unknown field: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> Student {
        Student {
            id: "1700000000000".to_string(),
            first_name: "Ann".to_string(),
            last_name: String::new(),
            email: "a@x.com".to_string(),
            age: "10".to_string(),
            grade: "5".to_string(),
        }
    }

    #[test]
    fn test_student_serializes_camel_case() {
        let json = serde_json::to_string(&ann()).unwrap();
        assert!(json.contains("\"firstName\":\"Ann\""));
        assert!(json.contains("\"lastName\":\"\""));
        assert!(!json.contains("first_name"));
    }

    #[test]
    fn test_student_missing_last_name_defaults_empty() {
        let json = r#"{"id":"1","firstName":"Bo","email":"b@x.com","age":"9","grade":"4"}"#;
        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.last_name, "");
        assert_eq!(student.full_name(), "Bo");
    }

    #[test]
    fn test_from_fields_keeps_id() {
        let mut form = ann().form();
        form.grade = "6".to_string();

        let updated = Student::from_fields("1700000000000".to_string(), form);
        assert_eq!(updated.id(), "1700000000000");
        assert_eq!(updated.grade, "6");
        assert_eq!(Student::storage_key(), "students");
    }

    #[test]
    fn test_missing_required_skips_last_name() {
        let mut form = ann().form();
        assert_eq!(form.missing_required(), None);

        form.set(FormField::Age, "");
        assert_eq!(form.missing_required(), Some(FormField::Age));

        form.set(FormField::FirstName, "");
        assert_eq!(form.missing_required(), Some(FormField::FirstName));

        let only_last = StudentForm {
            last_name: "Lee".to_string(),
            ..Default::default()
        };
        assert_eq!(only_last.missing_required(), Some(FormField::FirstName));
    }

    #[test]
    fn test_form_field_from_str() {
        assert_eq!("first_name".parse::<FormField>().unwrap(), FormField::FirstName);
        assert_eq!("lastName".parse::<FormField>().unwrap(), FormField::LastName);
        assert_eq!("GRADE".parse::<FormField>().unwrap(), FormField::Grade);
        assert!("phone".parse::<FormField>().is_err());
    }
}
