fn main() {
    horde_runtime::game::run();
}
