use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct Hashes {
    pub md5: bool,
    pub sha1: bool,
    pub sha256: bool,
}

impl Hashes {
    /// Check if at least one hash algorithm is selected
    pub fn any(&self) -> bool {
        self.md5 || self.sha1 || self.sha256
    }
}

impl Default for Hashes {
    fn default() -> Self {
        Hashes {
            md5: true,
            sha1: true,
            sha256: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct FuzzyHashes {
    pub ssdeep: bool,
    pub tlsh: bool,
}

impl FuzzyHashes {
    /// Check if at least one fuzzy hash algorithm is selected
    pub fn any(&self) -> bool {
        self.ssdeep || self.tlsh
    }
}

#[cfg(test)]
mod tests {
    use super::{FuzzyHashes, Hashes};

    #[test]
    fn test_hashes_any() {
        let hashes = Hashes::default();
        assert_eq!(hashes.any(), true);

        let none = Hashes {
            md5: false,
            sha1: false,
            sha256: false,
        };
        assert_eq!(none.any(), false);
    }

    #[test]
    fn test_fuzzy_hashes_any() {
        let fuzzy = FuzzyHashes::default();
        assert_eq!(fuzzy.any(), false);

        let ssdeep_only = FuzzyHashes {
            ssdeep: true,
            tlsh: false,
        };
        assert_eq!(ssdeep_only.any(), true);
    }
}
