// Dialog and detail-view surface the controllers talk to

use crate::record::Student;

/// Presentation layer collaborator
pub trait Presenter {
    /// Blocking message with a single acknowledgement
    fn alert(&mut self, title: &str, message: &str);

    /// Destructive-action confirmation, true when the user accepts
    fn confirm(&mut self, title: &str, message: &str) -> bool;

    /// Read-only detail view of one record
    fn show_detail(&mut self, student: &Student);
}
