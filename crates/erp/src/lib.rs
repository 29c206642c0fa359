//! Clients for the ERP side of the package import: the Azure AD token
//! endpoint and the D365FO data-management OData actions.

pub mod data_management;
pub mod error;
pub mod identity;

pub use data_management::{DataManagementApi, ImportFromPackage, WriteUrl};
pub use error::ErpApiError;
pub use identity::{AccessToken, IdentityClient};
