pub mod credentials;
pub mod price;
pub mod region;
pub mod token;

pub use credentials::*;
pub use price::*;
pub use region::*;
pub use token::*;
