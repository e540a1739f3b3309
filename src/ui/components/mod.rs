pub mod input_bar;
pub mod message_list;
pub mod orb;

pub use input_bar::InputBar;
pub use message_list::MessageList;
pub use orb::{Orb, OrbAnimation, Spring};
