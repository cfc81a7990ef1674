mod treeplex;

pub use self::treeplex::{SequenceId, Treeplex};
