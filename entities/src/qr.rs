use shared_kernel::string_key;

string_key!(QrCode);

impl QrCode {
    /// Opaque entry token. Random v4 bits, so it cannot be derived from the
    /// booking id it accompanies.
    pub fn generate() -> Self {
        QrCode::new(uuid::Uuid::new_v4().simple().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_unique() {
        assert_ne!(QrCode::generate(), QrCode::generate());
    }
}
