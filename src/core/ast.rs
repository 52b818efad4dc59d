/// Structured content of one document, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTree {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Table(Vec<Vec<String>>),
}

impl ContentTree {
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(text) => Some(text.as_str()),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &[Vec<String>]> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Table(rows) => Some(rows.as_slice()),
            Block::Paragraph(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
