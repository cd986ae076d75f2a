use super::surface::Point;

/// Logical geometry of the board in terminal cells.
///
/// Rows from top to bottom: player markers, one row per pile, opponents
/// (label line plus played card), the local player's label and played card,
/// then the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub card_width: u16,
    pub card_height: u16,
    pub block_width: u16,
    pub marker_spacing: u16,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            card_width: 6,
            card_height: 4,
            block_width: 18,
            marker_spacing: 3,
        }
    }
}

const STACKS_TOP: u16 = 2;

/// `count` cells of `size` each, saturating instead of wrapping.
fn span(count: usize, size: u16) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX).saturating_mul(size)
}

impl BoardLayout {
    pub fn marker(&self, index: usize) -> Point {
        Point::new(span(index, self.marker_spacing) as f32, 0.0)
    }

    pub fn pile_slot(&self, stack: usize, slot: usize) -> Point {
        Point::new(
            span(slot, self.card_width) as f32,
            STACKS_TOP.saturating_add(span(stack, self.card_height)) as f32,
        )
    }

    pub fn others_top(&self, stack_count: usize) -> u16 {
        STACKS_TOP
            .saturating_add(span(stack_count, self.card_height))
            .saturating_add(1)
    }

    pub fn other_block(&self, stack_count: usize, block: usize) -> Point {
        Point::new(
            span(block, self.block_width) as f32,
            self.others_top(stack_count) as f32,
        )
    }

    pub fn other_played(&self, stack_count: usize, block: usize) -> Point {
        let label = self.other_block(stack_count, block);
        Point::new(label.x, label.y + 1.0)
    }

    pub fn own_top(&self, stack_count: usize) -> u16 {
        self.others_top(stack_count)
            .saturating_add(self.card_height)
            .saturating_add(2)
    }

    pub fn own_label(&self, stack_count: usize) -> Point {
        Point::new(0.0, self.own_top(stack_count) as f32)
    }

    pub fn own_played(&self, stack_count: usize) -> Point {
        Point::new(0.0, self.own_top(stack_count).saturating_add(1) as f32)
    }

    pub fn hand_slot(&self, stack_count: usize, position: usize) -> Point {
        Point::new(
            span(position, self.card_width) as f32,
            self.own_top(stack_count)
                .saturating_add(1)
                .saturating_add(self.card_height) as f32,
        )
    }

    pub fn height(&self, stack_count: usize) -> u16 {
        self.own_top(stack_count)
            .saturating_add(1)
            .saturating_add(self.card_height.saturating_mul(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_do_not_overlap() {
        let layout = BoardLayout::default();
        let last_pile = layout.pile_slot(3, 0);
        assert!(last_pile.y + layout.card_height as f32 <= layout.others_top(4) as f32);
        let opponent_card = layout.other_played(4, 0);
        assert!(opponent_card.y + layout.card_height as f32 <= layout.own_top(4) as f32);
        let hand = layout.hand_slot(4, 0);
        assert!(hand.y >= layout.own_played(4).y + layout.card_height as f32);
        assert_eq!(layout.height(4) as f32, hand.y + layout.card_height as f32);
    }

    #[test]
    fn test_huge_counts_saturate() {
        let layout = BoardLayout::default();
        let far = layout.pile_slot(usize::MAX, 70_000);
        assert_eq!(far.x, u16::MAX as f32);
        assert_eq!(far.y, u16::MAX as f32);
        assert_eq!(layout.marker(100_000).x, u16::MAX as f32);
        assert_eq!(layout.height(usize::MAX), u16::MAX);
        assert_eq!(layout.hand_slot(3, 20_000).x, u16::MAX as f32);
    }
}
