fn main() {
    stock_trend::cli::run();
}
