/// Login state for the app.
///
/// - `claims` - decoding of the identity token payload
/// - `provider` - the identity provider seam and its Cognito implementation
/// - `gateway` - session lookup, login/logout and the routing invariant
pub mod claims;
pub mod gateway;
pub mod provider;

pub use claims::{Claims, decode_claims};
pub use gateway::{IdentityGateway, Session, Surface, enforce_route, reviewer_identity};
pub use provider::{CognitoProvider, IdentityProvider};
