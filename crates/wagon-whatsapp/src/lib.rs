//! # wagon-whatsapp
//!
//! WhatsApp adapter built on `whatsapp-rust` (WhatsApp Web protocol: Noise
//! handshake + Signal encryption). Pairing is done by scanning a QR code,
//! like WhatsApp Web. Session is persisted to
//! `{data_dir}/whatsapp_session/whatsapp.db`.

mod groups;
mod qr;
mod send;
mod session;
mod transport;


pub use qr::{generate_qr_png, generate_qr_terminal};
pub use session::WhatsAppSession;
