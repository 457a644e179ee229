//! Company service: use-cases for customer accounts.

use terminal_domain::company::Company;
use terminal_domain::error::{NotFoundError, TerminalError, ValidationError};
use terminal_domain::id::CompanyId;

use crate::ports::CompanyRepository;

/// Application service for company CRUD operations.
pub struct CompanyService<R> {
    repo: R,
}

impl<R: CompanyRepository> CompanyService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a company with a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::Validation`] when the name is blank, too long
    /// or already taken, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn create_company(&self, name: String) -> Result<Company, TerminalError> {
        let name = name.trim().to_string();
        Company::validate_name(&name)?;
        if self.repo.find_by_name(&name).await?.is_some() {
            return Err(TerminalError::field("name", ValidationError::DuplicateName));
        }
        let company = self.repo.create(name).await?;
        tracing::info!(company_id = %company.id, "company created");
        Ok(company)
    }

    /// Look up a company by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TerminalError::NotFound`] when no company with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_company(&self, id: CompanyId) -> Result<Company, TerminalError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Company",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all companies.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_companies(&self) -> Result<Vec<Company>, TerminalError> {
        self.repo.get_all().await
    }
}
