mod kernel;
mod logger;

use kernel::Driver;

fn main() {
    logger::init();

    let mut driver = Driver::new();
    driver.start();
}
