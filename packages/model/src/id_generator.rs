use crc32fast::Hasher;

/// Derive a short stable seed from a document id using CRC32
pub fn get_document_seed(document_id: &str) -> String {
    let mut buff = String::from(document_id);
    if !document_id.starts_with("page://") {
        buff = format!("page://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential block id generator for a single document
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    seed: Option<String>,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_id: &str) -> Self {
        Self {
            seed: Some(get_document_seed(document_id)),
            count: 0,
        }
    }

    /// Seed lazily (documents deserialized from JSON start unseeded)
    pub fn ensure_seeded(&mut self, document_id: &str) {
        if self.seed.is_none() {
            self.seed = Some(get_document_seed(document_id));
        }
    }

    /// Generate the next id that `is_taken` does not reject
    pub fn next_free(&mut self, is_taken: impl Fn(&str) -> bool) -> String {
        loop {
            let id = self.new_id();
            if !is_taken(&id) {
                return id;
            }
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-b{}", self.seed(), self.count)
    }

    pub fn seed(&self) -> &str {
        self.seed.as_deref().unwrap_or("blk")
    }
}
