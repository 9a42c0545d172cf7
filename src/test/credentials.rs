#[cfg(test)]
mod tests {
    use crate::auth::{
        IssuedPassword, PASSWORD_CHARSET, PASSWORD_SUFFIX_LEN, Role, generate_password,
        hash_password, verify_password,
    };
    use crate::test::test_utils::TEST_BCRYPT_COST;

    #[test]
    fn test_generated_password_shape() {
        for role in Role::ALL {
            let password = generate_password(role);
            let prefix = role.password_prefix();

            assert!(password.starts_with(prefix));
            assert_eq!(password.len(), prefix.len() + PASSWORD_SUFFIX_LEN);
            assert!(
                password[prefix.len()..]
                    .bytes()
                    .all(|b| PASSWORD_CHARSET.contains(&b))
            );
        }
    }

    #[test]
    fn test_generated_passwords_differ() {
        let first = generate_password(Role::Parent);
        let second = generate_password(Role::Parent);
        assert_ne!(first, second);
    }

    #[test]
    fn test_charset_has_no_lookalikes() {
        for c in [b'0', b'O', b'1', b'l', b'I'] {
            assert!(!PASSWORD_CHARSET.contains(&c));
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Coach7xK2mPq!", TEST_BCRYPT_COST).unwrap();

        assert_ne!(hash, "Coach7xK2mPq!");
        assert!(verify_password("Coach7xK2mPq!", &hash));
        assert!(!verify_password("Coach7xK2mPq?", &hash));
        assert!(!verify_password("Coach7xK2mPq!", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_issued_password_matches_its_hash() {
        let issued = IssuedPassword::generate(Role::Coach, TEST_BCRYPT_COST).unwrap();
        assert!(issued.password.starts_with(Role::Coach.password_prefix()));
        assert!(verify_password(&issued.password, &issued.hash));

        let chosen = IssuedPassword::from_plain("password123".to_string(), TEST_BCRYPT_COST).unwrap();
        assert_eq!(chosen.password, "password123");
        assert!(verify_password("password123", &chosen.hash));
    }
}
