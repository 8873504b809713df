fn main() {
    wc26_simulator_lib::run()
}
