// End-to-end flow: provision a secret, derive a code, verify it, render the
// enrollment URI. Mirrors what a second-factor enrollment endpoint does.

use totpkit::{Totp, TotpOptions};

#[test]
fn totp_workflow() {
    let totp = Totp::new();

    let secret = totp.generate_secret().unwrap();
    let code = totp.get_code(&secret, None).unwrap();
    assert!(totp.verify_code(&secret, &code, 1, None).unwrap());

    let audit = totp.audit_secret(&secret);
    assert!(audit.is_strong);

    // User scans the QR code built from this URI and enters the code
    let uri = totp
        .generate_uri(&secret, "user@example.com", "ExampleService")
        .unwrap();
    assert!(uri.starts_with("otpauth://totp/"));
    assert!(uri.contains(&format!("secret={secret}")));
    assert!(uri.contains("issuer=ExampleService"));
}

#[test]
fn totp_workflow_sha256_8_digits() {
    let totp = Totp::with_options(&TotpOptions {
        algorithm: Some("sha256".to_string()),
        digits: Some(8),
        ..TotpOptions::default()
    })
    .unwrap();

    let secret = totp.generate_secret().unwrap();
    let code = totp.get_code(&secret, None).unwrap();
    assert_eq!(code.len(), 8);
    assert!(totp.verify_code(&secret, &code, 1, None).unwrap());
}

#[test]
fn replay_protected_login_flow() {
    let totp = Totp::new();
    let secret = totp.generate_secret().unwrap();

    // The caller persists the watermark between logins; we start from 0
    let mut last_accepted = 0i64;

    let code = totp.get_code(&secret, None).unwrap();
    let matched = totp
        .verify_code_once(&secret, &code, last_accepted, 1)
        .unwrap()
        .expect("first use of the code must be accepted");
    last_accepted = matched;

    // Same code again: replay, rejected without an error
    assert_eq!(
        totp.verify_code_once(&secret, &code, last_accepted, 1).unwrap(),
        None
    );
}
