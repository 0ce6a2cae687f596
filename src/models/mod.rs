pub mod device_tickets;
pub mod payment_verifications;
pub mod registration_summary;
pub mod registrations;

pub use device_tickets::DeviceTicketRow;
pub use payment_verifications::PaymentVerification;
pub use registration_summary::RegistrationSummary;
pub use registrations::{GroupMember, Registration, RegistrationType};
