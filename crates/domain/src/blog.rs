use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{BlogId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    pub name: String,
    pub description: String,
    pub website_url: String,
    pub created_at: Timestamp,
    pub is_membership: bool,
}

impl Blog {
    pub fn create(
        id: BlogId,
        name: impl Into<String>,
        description: impl Into<String>,
        website_url: impl Into<String>,
        now: Timestamp,
    ) -> DomainResult<Self> {
        let name = validate_name(name.into())?;
        let website_url = validate_website_url(website_url.into())?;
        Ok(Self {
            id,
            name,
            description: description.into(),
            website_url,
            created_at: now,
            is_membership: false,
        })
    }

    pub fn update(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        website_url: impl Into<String>,
    ) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        self.website_url = validate_website_url(website_url.into())?;
        self.description = description.into();
        Ok(())
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let name = name.trim().to_owned();
    if name.is_empty() {
        return Err(DomainError::invalid_argument("name", "cannot be empty"));
    }
    if name.len() > 15 {
        return Err(DomainError::invalid_argument("name", "too long"));
    }
    Ok(name)
}

fn validate_website_url(url: String) -> DomainResult<String> {
    if url.len() > 100 {
        return Err(DomainError::invalid_argument("websiteUrl", "too long"));
    }
    if !url.starts_with("https://") {
        return Err(DomainError::invalid_argument(
            "websiteUrl",
            "must start with https://",
        ));
    }
    Ok(url)
}
