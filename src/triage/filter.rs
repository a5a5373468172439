use tracing::debug;

use crate::github::Issue;
use crate::repository::Repository;

/// A side-effect free check that tells whether an issue has already been triaged
pub trait TriageFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn triaged(&self, repository: &Repository, issue: &Issue) -> bool;
}

/// Issues opened by a collaborator never need triage
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenedByCollaborator;

impl TriageFilter for OpenedByCollaborator {
    fn name(&self) -> &'static str {
        "opened-by-collaborator"
    }

    fn triaged(&self, repository: &Repository, issue: &Issue) -> bool {
        if repository.is_collaborator(&issue.user.login) {
            debug!("{} has been triaged. It was opened by {}", issue, issue.user);
            return true;
        }
        false
    }
}

/// Any label at all means someone has already looked at the issue
#[derive(Debug, Default, Clone, Copy)]
pub struct Labelled;

impl TriageFilter for Labelled {
    fn name(&self) -> &'static str {
        "labelled"
    }

    fn triaged(&self, _repository: &Repository, issue: &Issue) -> bool {
        if issue.labels.is_empty() {
            return false;
        }
        debug!("{} has been triaged. It has been labelled", issue);
        true
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MilestoneApplied;

impl TriageFilter for MilestoneApplied {
    fn name(&self) -> &'static str {
        "milestone-applied"
    }

    fn triaged(&self, _repository: &Repository, issue: &Issue) -> bool {
        match &issue.milestone {
            Some(milestone) => {
                debug!(
                    "{} has been triaged. It has been added to milestone {}",
                    issue, milestone.title
                );
                true
            }
            None => false,
        }
    }
}

/// The standard filter chain, cheapest check first
pub fn default_filters() -> Vec<Box<dyn TriageFilter>> {
    vec![
        Box::new(OpenedByCollaborator),
        Box::new(Labelled),
        Box::new(MilestoneApplied),
    ]
}
