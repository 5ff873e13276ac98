use stacktiff::Dataset;
use std::time::Instant;

fn main() {
    let path = std::env::args()
        .nth(1)
        .expect("usage: stacktiff <dataset directory>");
    println!("Opening {path}");

    let t0 = Instant::now();
    let dataset = Dataset::open(&path, false).unwrap();
    println!("Opened in {:.6}s", t0.elapsed().as_secs_f64());

    println!("{dataset}");
    println!("channels: {:?}", dataset.channel_names());
    println!("positions: {}", dataset.num_xy_positions());
    println!("frames: {}", dataset.num_frames());
    if let Some((min, max)) = dataset.min_max_z_index() {
        println!("z range: {min}..={max}");
    }
    let (rows, cols) = dataset.num_rows_and_cols();
    println!("grid: {rows} rows x {cols} cols");
}
