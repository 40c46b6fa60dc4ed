use assert_cmd::Command;

// ================================================================================================
// ogsel seqstat
// ================================================================================================

#[test]
fn command_seqstat() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    let output = cmd
        .arg("seqstat")
        .arg("tests/newick/balanced.nwk")
        .arg("--seq-list")
        .arg("tests/seqs/genomes.tsv")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout.lines().count(), 7);
    assert_eq!(
        stdout,
        "root\t1\t30\nX\t1\t30\nY\t2\t25\nA\t2\t20\nB\t1\t30\nC\t2\t25\nD\t3\t12\n"
    );

    Ok(())
}

#[test]
fn command_seqstat_mixed_sources() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    let output = cmd
        .arg("seqstat")
        .arg("tests/newick/caterpillar.nwk")
        .arg("-s")
        .arg("A=tests/seqs/A.fa")
        .arg("-s")
        .arg("B=tests/seqs/D.fa.gz")
        .arg("-s")
        .arg("C=tests/seqs/C")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(stdout.contains("X\t2\t20\n"));
    assert!(stdout.contains("root\t2\t25\n"));

    Ok(())
}

#[test]
fn command_seqstat_missing() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    cmd.arg("seqstat")
        .arg("tests/newick/caterpillar.nwk")
        .arg("-s")
        .arg("A=tests/seqs/A.fa")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Unable to read sequences of B"));

    Ok(())
}

// ================================================================================================
// ogsel label
// ================================================================================================

#[test]
fn command_label() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    let output = cmd
        .arg("label")
        .arg("stdin")
        .write_stdin("((A,B),(C,D)Anc0,E);\n")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "((A,B)Anc2,(C,D)Anc0,E)Anc1;\n");

    Ok(())
}

#[test]
fn command_label_named() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    let output = cmd
        .arg("label")
        .arg("tests/newick/balanced.nwk")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert_eq!(stdout, "((A:1,B:1)X:1,(C:1,D:1)Y:1)root;\n");

    Ok(())
}

#[test]
fn command_no_args() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("ogsel")?;
    let output = cmd.output()?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(stderr.contains("greedy"));
    assert!(stderr.contains("dynamic"));

    Ok(())
}
