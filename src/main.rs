fn main() {
    synesthesia_battery_lib::run()
}
