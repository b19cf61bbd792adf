use gcode_transform_test_utils::Sandbox;

const BIN: &str = "gcode-transform";

const SMALL_PROGRAM: &str = "\
; generated by slicer
G90
M83
G1 Z0.2 F600
G1 X10 Y0 E0.5 F1800 ; first
G91
G1 X5 Y0 E0.1
M106 S255
G1 Y2
G90
G1 X10 ; back
";

#[test]
fn test_absolute_quarter_turn() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X10 Y0\n");
    let output = sb.snapshot_run(BIN, ["--rotate", "90", "--center", "0x0", "part.gcode"]);
    insta::assert_snapshot!(output, @r"
    exit: 0
    --- stdout
    G1 X0.000 Y-10.000
    --- stderr
    ");
}

#[test]
fn test_relative_moves_ignore_shift() {
    let sb = Sandbox::new();
    let out = sb
        .cmd(
            BIN,
            ["--rotate", "90", "--shiftx", "5", "--shifty", "5", "-"],
        )
        .stdin_bytes("G91\nG1 X5 Y0\n")
        .stdout_capture()
        .run()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&out.stdout), "G91\nG1 X0.000 Y-5.000\n");
}

#[test]
fn test_full_program() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", SMALL_PROGRAM);
    let output = sb
        .run(
            BIN,
            ["--rotate", "90", "--center", "0x0", "--shiftx", "100", "part.gcode"],
        )
        .unwrap();
    insta::assert_snapshot!(output, @r"
    ; generated by slicer
    G90
    M83
    G1 Z0.2 F600
    G1 X100.000 Y-10.000 E0.5 F1800 ; first
    G91
    G1 X0.000 Y-5.000 E0.1
    M106 S255
    G1 X2.000 Y0.000
    G90
    G1 X102.000 Y-10.000 ; back
    ");
}

#[test]
fn test_preserve_axes() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", SMALL_PROGRAM);
    let output = sb
        .run(
            BIN,
            ["--rotate", "90", "--center", "0x0", "--preserve-axes", "part.gcode"],
        )
        .unwrap();
    assert!(output.contains("\nG1 Y0.000\n"));
    assert!(output.ends_with("G1 X2.000 ; back\n"));
}

#[test]
fn test_non_motion_lines_are_byte_identical() {
    let program = "M104 S210 ; hotend\r\nT1\r\n;G1 X10 Y10\r\n\r\nG28 X Y\r\nG4 P500";
    let mut sb = Sandbox::new();
    sb.write("part.gcode", program);
    let output = sb.run(BIN, ["--rotate", "12.5", "part.gcode"]).unwrap();
    assert_eq!(output, program);
}

#[test]
fn test_output_file() {
    let mut sb = Sandbox::new();
    sb.write("in.gcode", "G1 X1 Y2\n");
    let stdout = sb
        .run(BIN, ["--shifty", "-2", "-o", "out.gcode", "in.gcode"])
        .unwrap();
    assert_eq!(stdout, "");
    assert_eq!(sb.read("out.gcode"), "G1 X1.000 Y0.000\n");
    assert_eq!(sb.read("in.gcode"), "G1 X1 Y2\n");
}

#[test]
fn test_in_place() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G90\nG1 X1 Y2 ; keep\n");
    let stdout = sb
        .run(BIN, ["--shiftx", "1.5", "--precision", "1", "-i", "part.gcode"])
        .unwrap();
    assert_eq!(stdout, "");
    assert_eq!(sb.read("part.gcode"), "G90\nG1 X2.5 Y2.0 ; keep\n");
}

#[test]
fn test_output_onto_input_is_rejected() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X10 Y0\n");
    let output = sb.snapshot_run(
        BIN,
        ["--rotate", "90", "-o", "./part.gcode", "part.gcode"],
    );
    insta::assert_snapshot!(output, @r"
    exit: 1
    --- stdout
    --- stderr
    Error: Output file './part.gcode' is the input file; use --in-place to rewrite it
    ");
    assert_eq!(sb.read("part.gcode"), "G1 X10 Y0\n");
}

#[test]
fn test_non_utf8_comment_passes_through() {
    let sb = Sandbox::new();
    let out = sb
        .cmd(BIN, ["--rotate", "90", "--center", "0x0"])
        .stdin_bytes(&b"; 210\xb0C\nG1 X1 Y1 ; \xb0\n"[..])
        .stdout_capture()
        .run()
        .unwrap();
    assert_eq!(out.stdout, b"; 210\xb0C\nG1 X1.000 Y-1.000 ; \xb0\n");
}

#[test]
fn test_in_place_non_utf8() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", b"; 210\xb0C\nG1 X1 Y1\n");
    sb.run(BIN, ["--shiftx", "1", "-i", "part.gcode"]).unwrap();
    let rewritten = std::fs::read(sb.root_path().join("part.gcode")).unwrap();
    assert_eq!(rewritten, b"; 210\xb0C\nG1 X2.000 Y1.000\n");
}

#[test]
fn test_diff() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G90\nG1 X10 Y0\nM84\n");
    let output = sb
        .run(BIN, ["--rotate", "90", "--center", "0x0", "--diff", "part.gcode"])
        .unwrap();
    assert!(output.starts_with("--- old/part.gcode\n+++ new/part.gcode\n"));
    assert!(output.contains("\n-G1 X10 Y0\n+G1 X0.000 Y-10.000\n"));
    assert!(output.contains("\n G90\n"));
    assert_eq!(sb.read("part.gcode"), "G90\nG1 X10 Y0\nM84\n");
}

#[test]
fn test_header() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X125 Y100\n");
    let output = sb
        .run(BIN, ["--rotate", "4", "--shiftx", "-5", "--header", "part.gcode"])
        .unwrap();
    insta::assert_snapshot!(output, @r"
    ; G-code file modified by gcode-transform
    ; Original: part.gcode
    ; Center: 125x100, Rotation: 4°
    ; Translation: X=-5.000mm, Y=0.000mm

    G1 X120.000 Y100.000
    ");
}

#[test]
fn test_config_file() {
    let mut sb = Sandbox::new();
    sb.write(
        "transform.toml",
        "rotate = 90\ncenter = \"0x0\"\nshiftx = 50\nprecision = 2\n",
    );
    sb.write("part.gcode", "G1 X10 Y0\n");
    let output = sb
        .run(
            BIN,
            ["--config", "transform.toml", "--shiftx", "0", "part.gcode"],
        )
        .unwrap();
    assert_eq!(output, "G1 X0.00 Y-10.00\n");
}

#[test]
fn test_identity_copies_and_warns() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X10.12345 Y3\n");
    let output = sb
        .cmd(BIN, ["part.gcode"])
        .stdout_capture()
        .stderr_capture()
        .run()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "G1 X10.12345 Y3\n");
    assert!(String::from_utf8_lossy(&output.stderr).contains("No rotation or shift requested"));
}

#[test]
fn test_invalid_center() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X10 Y0\n");
    let output = sb.snapshot_run(BIN, ["--center", "125,100", "part.gcode"]);
    insta::assert_snapshot!(output, @r"
    exit: 1
    --- stdout
    --- stderr
    Error: Invalid transform configuration
      Invalid center '125,100': expected '<X>x<Y>' (e.g. '125x100')
    ");
}

#[test]
fn test_negative_precision() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X10 Y0\n");
    let output = sb.snapshot_run(BIN, ["--precision", "-1", "part.gcode"]);
    insta::assert_snapshot!(output, @r"
    exit: 1
    --- stdout
    --- stderr
    Error: Invalid transform configuration
      Precision must be non-negative, got -1
    ");
}

#[test]
fn test_non_numeric_rotation_is_a_usage_error() {
    let mut sb = Sandbox::new();
    sb.write("part.gcode", "G1 X10 Y0\n");
    let output = sb.snapshot_run(BIN, ["--rotate", "ninety", "part.gcode"]);
    assert!(output.starts_with("exit: 2\n--- stdout\n--- stderr\n"));
    assert!(output.contains("invalid value 'ninety'"));
}

#[test]
fn test_missing_input_file() {
    let sb = Sandbox::new();
    let output = sb.snapshot_run(BIN, ["--rotate", "1", "missing.gcode"]);
    assert!(output.starts_with("exit: 1\n--- stdout\n--- stderr\n"));
    assert!(output.contains("Error: Failed to open input file 'missing.gcode'"));
}

#[test]
fn test_in_place_requires_input() {
    let sb = Sandbox::new();
    let output = sb.snapshot_run(BIN, ["--rotate", "1", "-i"]);
    assert!(output.starts_with("exit: 2\n"));
}

#[test]
fn test_help() {
    let output = Sandbox::new().run(BIN, ["--help"]).unwrap();
    assert!(output.contains("Rotate and shift G-code coordinates"));
    assert!(output.contains("--center <XxY>"));
    assert!(output.contains("Positive --rotate turns clockwise"));
}
