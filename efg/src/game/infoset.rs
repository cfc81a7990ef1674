use crate::treeplex::SequenceId;

/// Position of one information set inside a treeplex. The sequences of the
/// information set are `start_sequence..=end_sequence`, in action order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Infoset {
    pub parent_sequence: SequenceId,
    pub start_sequence: SequenceId,
    pub end_sequence: SequenceId,
}

impl Infoset {
    pub fn new(
        parent_sequence: SequenceId,
        start_sequence: SequenceId,
        end_sequence: SequenceId,
    ) -> Infoset {
        Infoset {
            parent_sequence,
            start_sequence,
            end_sequence,
        }
    }

    pub fn sequences(&self) -> std::ops::RangeInclusive<SequenceId> {
        self.start_sequence..=self.end_sequence
    }

    pub fn num_actions(&self) -> usize {
        self.end_sequence - self.start_sequence + 1
    }
}
