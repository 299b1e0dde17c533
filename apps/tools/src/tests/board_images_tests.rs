use super::*;

const BOARD_HTML: &str = r#"
<section class="board">
  <img src="assets/images/board/jane-doe.jpg" alt="Jane Doe, President">
  <img class="logo" src="assets/images/logo.png" alt="Logo">
  <IMG src="/assets/images/board/sam-lee.jpg" alt="Sam Lee, Treasurer">
  <img src="assets/images/hero/trail.jpg" alt="Trail">
</section>
"#;

fn site(files: &[(&str, &[u8])]) -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("tempdir");
    for (path, contents) in files {
        let path = root.path().join(path);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }
    root
}

#[test]
fn only_board_images_with_alt_are_extracted() {
    let images = extract_board_images(BOARD_HTML);

    assert_eq!(
        images,
        vec![
            ImageRef {
                src: "assets/images/board/jane-doe.jpg".into(),
                alt: "Jane Doe, President".into(),
            },
            ImageRef {
                src: "/assets/images/board/sam-lee.jpg".into(),
                alt: "Sam Lee, Treasurer".into(),
            },
        ]
    );
}

#[test]
fn reports_found_missing_and_extra_files() {
    let root = site(&[
        (BOARD_PAGE, BOARD_HTML.as_bytes()),
        ("assets/images/board/jane-doe.jpg", &[0u8; 2048][..]),
        ("assets/images/board/old-member.jpg", &b"jpg"[..]),
        ("assets/images/board/notes.txt", &b"not an image"[..]),
    ]);

    let report = validate(root.path()).expect("report");

    let found: Vec<_> = report.found().map(|c| c.image.alt.as_str()).collect();
    let missing: Vec<_> = report.missing().map(|c| c.image.alt.as_str()).collect();
    assert_eq!(found, ["Jane Doe, President"]);
    assert_eq!(missing, ["Sam Lee, Treasurer"]);
    assert_eq!(report.checks[0].size_kb(), Some(2.0));
    assert_eq!(report.extra_files, ["old-member.jpg"]);
    assert!(report.has_missing());

    let rendered = report.render();
    assert!(rendered.contains("Found 2 board member images in HTML"));
    assert!(rendered.contains("Size: 2.00 KB"));
    assert!(rendered.contains("   - Sam Lee, Treasurer: /assets/images/board/sam-lee.jpg"));
    assert!(rendered.contains("   - old-member.jpg"));
}

#[test]
fn complete_site_has_nothing_missing() {
    let root = site(&[
        (BOARD_PAGE, BOARD_HTML.as_bytes()),
        ("assets/images/board/jane-doe.jpg", &b"a"[..]),
        ("assets/images/board/sam-lee.jpg", &b"b"[..]),
    ]);

    let report = validate(root.path()).expect("report");

    assert!(!report.has_missing());
    assert!(report.extra_files.is_empty());
    assert!(report.render().contains("All board member images are present!"));
}

#[test]
fn missing_board_directory_is_not_fatal() {
    let root = site(&[(BOARD_PAGE, BOARD_HTML.as_bytes())]);

    let report = validate(root.path()).expect("report");

    assert_eq!(report.missing().count(), 2);
    assert!(report.extra_files.is_empty());
}

#[test]
fn missing_board_page_is_an_error() {
    let root = tempfile::tempdir().expect("tempdir");

    let err = validate(root.path()).expect_err("no page");
    assert!(err.to_string().contains("failed to read board page"));
}
