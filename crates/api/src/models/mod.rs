//! Domain models and request/response types.
//!
//! Entity structs derive `sqlx::FromRow` for the repositories and `serde`
//! for the JSON surface. Sensitive fields never appear on the public view
//! types (`UserProfile` carries no password hash).

pub mod cart;
pub mod experience;
pub mod order;
pub mod user;
pub mod wishlist;

pub use cart::{AddToCartRequest, CartItem, UpdateCartRequest};
pub use experience::{Experience, ExperienceFilters, NewExperience, UpdateExperience};
pub use order::{AdminOrderSummary, CreateOrderRequest, CustomerDetails, Order, OrderItem};
pub use user::{LoginRequest, RegisterRequest, UpdateProfileRequest, User, UserProfile};
pub use wishlist::{AddToWishlistRequest, WishlistItem};
