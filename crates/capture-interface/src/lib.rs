#[macro_export]
macro_rules! common_derives {
    ($item:item) => {
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[cfg_attr(feature = "specta", derive(specta::Type))]
        $item
    };
}

mod enhancement;
mod message;

pub use enhancement::*;
pub use message::*;
