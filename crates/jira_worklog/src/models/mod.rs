mod issue;
mod timesheet;
mod worklog;

pub use issue::{parse_short_date, EditField, QuickEditIssue, TimeTracking};
pub use timesheet::{TimesheetIssue, TimesheetProject, TimesheetResponse};
pub use worklog::WorkLogEntry;
