use crate::detection_client::detection_endpoint::ImageUpload;
use std::fmt;

/// Identifies one detection request. Ids only ever grow, so a response can be matched against
/// the request the view is still waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubmissionId(u64);

impl SubmissionId {
    pub fn first() -> Self {
        SubmissionId(1)
    }

    pub fn successor(self) -> Self {
        SubmissionId(self.0 + 1)
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the caller needs to run a submission: its id (to hand back on completion) and the
/// image to upload.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionTicket {
    pub id: SubmissionId,
    pub upload: ImageUpload,
}
