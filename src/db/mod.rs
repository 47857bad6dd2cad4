pub mod bookingdb;
pub mod dashboarddb;
pub mod db;
pub mod paymentdb;
pub mod propertydb;
pub mod userdb;
pub mod visitdb;
pub mod wishlistdb;
