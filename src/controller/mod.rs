pub mod events;
pub mod subscribe;
pub mod vapid_public_key;
pub mod version;
