//! The GitHub capabilities this service knows how to ask for.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    StarRepository,
    ListRepositories,
    GetFileContent,
    CreateIssue,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::StarRepository,
        Capability::ListRepositories,
        Capability::GetFileContent,
        Capability::CreateIssue,
    ];

    /// Name as registered with the execution service.
    pub fn name(self) -> &'static str {
        match self {
            Capability::StarRepository => "GITHUB__STAR_REPOSITORY",
            Capability::ListRepositories => "GITHUB__LIST_REPOSITORIES",
            Capability::GetFileContent => "GITHUB__GET_FILE_CONTENT",
            Capability::CreateIssue => "GITHUB__CREATE_ISSUE",
        }
    }

    pub fn system_instruction(self) -> &'static str {
        match self {
            Capability::ListRepositories => {
                "You are a helpful assistant that can list GitHub repositories."
            }
            Capability::CreateIssue => {
                "You are a helpful assistant that files GitHub issues exactly as described, \
                 keeping the given title and body."
            }
            _ => "You are a helpful assistant with access to a variety of tools.",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn list_repositories_intent() -> String {
    "List my repositories".to_string()
}

pub fn star_repository_intent(repository: &str) -> String {
    format!("Star the {repository} GitHub repository for me")
}

pub fn file_content_intent(repository: &str, path: &str) -> String {
    format!("Get the content of {path} from the {repository} GitHub repository")
}

pub fn create_issue_intent(repository: &str, title: &str, body: &str) -> String {
    format!(
        "Create an issue in the {repository} GitHub repository with the title \"{title}\" \
         and exactly this body:\n\n{body}"
    )
}
