use crate::play::{Board, Frontend};

/// Prints the scene to stdout each time a render lands.
#[derive(Debug, Default)]
pub struct Headless {
    last_revision: Option<u64>,
}

impl Frontend for Headless {
    fn frame(&mut self, board: &Board<'_>) -> anyhow::Result<bool> {
        let revision = board.scene.revision();
        if self.last_revision != Some(revision) {
            self.last_revision = Some(revision);
            println!("--- {:?} ---", board.state);
            print!("{}", board.scene);
        }
        Ok(true)
    }
}
