pub mod bookingmodel;
pub mod paymentmodel;
pub mod propertymodel;
pub mod usermodel;
pub mod visitmodel;
