mod common;

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

fn regmap2h() -> Command {
    Command::new(env!("CARGO_BIN_EXE_regmap2h"))
}

#[test]
fn cli_generates_header_with_columns_given_up_front() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("uart.pdf");
    let output = dir.path().join("custom.h");
    common::create_uart_datasheet(&input).expect("PDF fixture should be created");

    let result = regmap2h()
        .args(["--pdf", &input.to_string_lossy(), "-b", "2", "-e", "3", "-P", "uart"])
        .args(["-f", &output.to_string_lossy(), "--name-col", "1", "--addr-col", "0"])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(0), "{result:?}");
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("successfully generated"), "{stdout}");
    let header = std::fs::read_to_string(&output).expect("header written");
    assert!(header.starts_with("#ifndef UART_H_\n#define UART_H_\n"), "{header}");
    assert!(header.contains("#define UART_BRR  0x10\n"), "{header}");
}

#[test]
fn cli_prompts_for_columns_on_stdin() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("uart.pdf");
    common::create_uart_datasheet(&input).expect("PDF fixture should be created");

    let mut child = regmap2h()
        .current_dir(dir.path())
        .args(["-p", &input.to_string_lossy(), "-b", "2", "-e", "3", "-P", "Uart"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("CLI should start");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"1\n0\n")
        .expect("answers written");
    let result = child.wait_with_output().expect("CLI should finish");

    assert_eq!(result.status.code(), Some(0), "{result:?}");
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("USER NOTICE"), "{stdout}");
    assert!(stdout.contains("[1] 1"), "{stdout}");
    let header = std::fs::read_to_string(dir.path().join("uart_reg.h")).expect("default name");
    assert!(header.contains("#define UART_SR   0x04\n"), "{header}");
}

#[test]
fn cli_exits_with_error_for_out_of_range_column() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("uart.pdf");
    let output = dir.path().join("never.h");
    common::create_uart_datasheet(&input).expect("PDF fixture should be created");

    let result = regmap2h()
        .args(["-p", &input.to_string_lossy(), "-b", "2", "-e", "3", "-P", "uart"])
        .args(["-f", &output.to_string_lossy(), "--name-col", "1", "--addr-col", "9"])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("out of range"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn cli_exits_with_error_for_missing_document() {
    let dir = tempdir().expect("tempdir should be created");
    let missing = dir.path().join("absent.pdf");

    let result = regmap2h()
        .args(["-p", &missing.to_string_lossy(), "-b", "1", "-e", "2", "-P", "uart"])
        .args(["--name-col", "0", "--addr-col", "1"])
        .current_dir(dir.path())
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("not found"));
}

#[test]
fn cli_exits_with_code_2_when_every_register_is_reserved() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("reserved.pdf");
    let output = dir.path().join("reserved.h");
    common::create_test_pdf(
        &input,
        &[vec!["RSVD_RESERVED  0x00", "Reserved  0x04"]],
    )
    .expect("PDF fixture should be created");

    let result = regmap2h()
        .args(["-p", &input.to_string_lossy(), "-b", "1", "-e", "1", "-P", "dma"])
        .args(["-f", &output.to_string_lossy(), "--name-col", "0", "--addr-col", "1"])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(2), "{result:?}");
    let header = std::fs::read_to_string(&output).expect("guards still written");
    assert_eq!(header, "#ifndef DMA_H_\n#define DMA_H_\n\n\n#endif\n");
}

#[test]
fn cli_rejects_reversed_page_range() {
    let result = regmap2h()
        .args(["-p", "ds.pdf", "-b", "9", "-e", "3", "-P", "uart"])
        .output()
        .expect("CLI should run");

    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("--beg/--end"));
}
