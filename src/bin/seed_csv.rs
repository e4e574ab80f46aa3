use anyhow::Result;

fn main() -> Result<()> {
    let path = std::path::Path::new("dev/csv");
    std::fs::create_dir_all(path)?;
    let csv_path = path.join("songs.csv");
    let mut wtr = csv::Writer::from_path(&csv_path)?;
    wtr.write_record(["Artist", "Song", "Explicit", "Popularity", "Tempo"])?;
    for row in [
        ["Alice", "First Light", "No", "71", "118.2"],
        ["Bob", "Night Drive", "Yes", "64", "96.0"],
        ["Carol", "Paper Boats", "no", "58", "132.5"],
        ["Dave", "Static, Again", "YES", "80", "124.0"],
        ["Eve", "Unknown", "unrated", "n/a", ""],
    ] {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    println!("Seeded CSV at {}", csv_path.display());
    println!(
        "Try: csv2sqlite import {} dev/csv/songs.db song \
         --column Popularity=integer --column Tempo=real",
        csv_path.display()
    );
    Ok(())
}
