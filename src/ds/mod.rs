pub mod recency_buffer;
pub mod shard;
pub mod slot_list;

pub use recency_buffer::RecencyBuffer;
pub use shard::ShardSelector;
pub use slot_list::{SlotId, SlotList, SlotListIter};
