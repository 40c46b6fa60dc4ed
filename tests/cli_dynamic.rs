use assert_cmd::Command;
use std::io::Write;
use tempfile::Builder;

// ================================================================================================
// ogsel dynamic
// ================================================================================================

fn seq_args(cmd: &mut Command) -> &mut Command {
    cmd.arg("-s")
        .arg("A=tests/seqs/A.fa")
        .arg("-s")
        .arg("B=tests/seqs/B.fa")
        .arg("-s")
        .arg("C=tests/seqs/C")
        .arg("-s")
        .arg("D=tests/seqs/D.fa.gz")
}

#[test]
fn command_dynamic_balanced() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic").arg("tests/newick/balanced.nwk");
    let output = seq_args(&mut cmd).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    // the root has nothing outside it
    assert!(!stdout.contains("root"));
    assert_eq!(stdout, "X\tC\t3\nX\tD\t3\nY\tA\t3\nY\tB\t3\n");

    Ok(())
}

#[test]
fn command_dynamic_one() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("-n")
        .arg("1")
        .arg("--parallel")
        .arg("2");
    let output = seq_args(&mut cmd).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    // C is longer and less fragmented than D, B is the whole root genome
    assert_eq!(stdout, "X\tC\t3\nY\tB\t3\n");

    Ok(())
}

#[test]
fn command_dynamic_seq_list() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    let output = cmd
        .arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("--seq-list")
        .arg("tests/seqs/genomes.tsv")
        .arg("-n")
        .arg("1")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "X\tC\t3\nY\tB\t3\n");

    Ok(())
}

#[test]
fn command_dynamic_dot() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("--format")
        .arg("dot");
    let output = seq_args(&mut cmd).output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.starts_with("digraph Outgroups {"));
    assert_eq!(stdout.matches("style=dashed").count(), 4);

    Ok(())
}

#[test]
fn command_dynamic_missing_leaf() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("-s")
        .arg("A=tests/seqs/A.fa")
        .arg("-s")
        .arg("B=tests/seqs/B.fa")
        .arg("-s")
        .arg("C=tests/seqs/C")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Unable to read sequences of D"));

    Ok(())
}

#[test]
fn command_dynamic_bad_source() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("-s")
        .arg("A=tests/seqs/no_such.fa")
        .assert()
        .failure()
        .stderr(predicates::str::contains("tests/seqs/no_such.fa"));

    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("-s")
        .arg("tests/seqs/A.fa")
        .assert()
        .failure()
        .stderr(predicates::str::contains("NAME=PATH"));

    Ok(())
}

#[test]
fn command_dynamic_unknown_genome() -> anyhow::Result<()> {
    let mut list = Builder::new().suffix(".tsv").tempfile()?;
    writeln!(list, "# name\tpath")?;
    for name in ["A", "B", "C", "Z"] {
        writeln!(list, "{}\ttests/seqs/A.fa", name)?;
    }
    writeln!(list, "D\ttests/seqs/D.fa.gz")?;
    let path = list.path().to_string_lossy().to_string();

    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("dynamic")
        .arg("tests/newick/balanced.nwk")
        .arg("--seq-list")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicates::str::contains("Z is not a node of the tree"));

    Ok(())
}
