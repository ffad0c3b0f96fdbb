//! Community request models.
//!
//! Name and description are lower-cased during normalization.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::{CommunityChanges, NewCommunity};
use crate::validators::{validate_not_blank, validation_errors_to_api_error};

/// Request payload for creating a community
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommunityRequest {
    #[validate(custom(function = "validate_not_blank", message = "Community name must not be empty"))]
    #[schema(example = "Zoolea")]
    pub name: String,
    #[schema(example = "this is zoolea community bla bla")]
    pub description: Option<String>,
}

impl CreateCommunityRequest {
    pub fn into_new_community(self) -> Result<NewCommunity, ApiError> {
        self.validate().map_err(validation_errors_to_api_error)?;
        Ok(NewCommunity {
            name: self.name.to_lowercase(),
            description: self.description.map(|d| d.to_lowercase()),
        })
    }
}

/// Request payload for updating a community
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCommunityRequest {
    #[validate(custom(function = "validate_not_blank", message = "Community name must not be empty"))]
    #[schema(example = "Zoolea")]
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateCommunityRequest {
    pub fn into_changes(self) -> Result<CommunityChanges, ApiError> {
        self.validate().map_err(validation_errors_to_api_error)?;
        Ok(CommunityChanges {
            name: self.name.map(|n| n.to_lowercase()),
            description: self.description.map(|d| d.to_lowercase()),
        })
    }
}
