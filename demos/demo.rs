/* demos/demo.rs */

use req::{
    IpOptions, Request, get_array, get_bool_or, get_int_or, get_ip_with_options,
    get_string_trimmed_or, ip, is_private_ip, maps, subdomain,
};

fn main() {
    println!("=== Request Parameter Examples ===\n");

    // Example 1: Scalar parameters with defaults
    example_1_scalars();

    // Example 2: Arrays in the three supported notations
    example_2_arrays();

    // Example 3: Nested parameters flattened into records
    example_3_maps();

    // Example 4: Subdomain of the request host
    example_4_subdomain();

    // Example 5: Common-case client IP
    example_5_simple_ip();

    // Example 6: Client IP behind trusted proxies
    example_6_trusted_proxies();

    // Example 7: Private range handling
    example_7_private_ranges();

    println!("=== All examples completed! ===");
}

fn form_request(uri: &str, body: &str) -> Request {
    Request::new("POST", uri)
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body(body)
}

fn example_1_scalars() {
    println!("Example 1: Scalar parameters with defaults");

    let req = form_request("/search?page=2&q=query", "q=%20form%20&exact=true");

    println!("q (form wins, trimmed): {:?}", get_string_trimmed_or(&req, "q", "none"));
    println!("page: {}", get_int_or(&req, "page", 1));
    println!("limit (missing): {}", get_int_or(&req, "limit", 20));
    println!("exact: {}", get_bool_or(&req, "exact", false));
    println!();
}

fn example_2_arrays() {
    println!("Example 2: Arrays in the three supported notations");

    for query in ["ids=1&ids=2", "ids%5B%5D=3&ids%5B%5D=4", "ids%5B1%5D=6&ids%5B0%5D=5"] {
        let req = Request::new("GET", &format!("/?{query}"));
        println!("{query:<28} -> {:?}", get_array(&req, "ids", vec![]));
    }
    println!();
}

fn example_3_maps() {
    println!("Example 3: Nested parameters flattened into records");

    let req = form_request(
        "/",
        "rows%5B0%5D%5Bname%5D=Alice&rows%5B0%5D%5Brole%5D=admin&rows%5B1%5D%5Bname%5D=Bob",
    );
    for (i, row) in maps(&req, "rows", vec![]).iter().enumerate() {
        println!("row {i}: {row:?}");
    }
    println!();
}

fn example_4_subdomain() {
    println!("Example 4: Subdomain of the request host");

    for host in ["shop.example.com", "example", "localhost"] {
        let req = Request::new("GET", &format!("http://{host}/"));
        println!("{host:<18} -> {:?}", subdomain(&req));
    }
    println!();
}

fn example_5_simple_ip() {
    println!("Example 5: Common-case client IP");

    let req = Request::new("GET", "/")
        .with_header("X-Forwarded-For", "203.0.113.5, 192.168.1.100, 10.0.0.5")
        .with_remote_addr("10.0.0.1:12345");
    println!("X-Forwarded-For chain -> {}", ip(&req));

    let req = Request::new("GET", "/").with_remote_addr("[2001:db8::1]:8080");
    println!("Peer address only      -> {}", ip(&req));
    println!();
}

fn example_6_trusted_proxies() {
    println!("Example 6: Client IP behind trusted proxies");

    let req = Request::new("GET", "/")
        .with_header("X-Real-IP", "203.0.113.10")
        .with_header("X-Forwarded-For", "198.51.100.50, 10.0.0.5, 127.0.0.1")
        .with_remote_addr("127.0.0.1:8080");

    let opts = IpOptions::new()
        .prefer_forwarded_for(true)
        .with_trusted_proxies(["10.0.0.0/8", "127.0.0.1"])
        .validate(true);
    println!("Prefer X-Forwarded-For -> {}", get_ip_with_options(Some(&req), &opts));

    let opts = opts.prefer_forwarded_for(false);
    println!("Prefer X-Real-IP       -> {}", get_ip_with_options(Some(&req), &opts));
    println!("No request             -> {:?}", get_ip_with_options(None, &opts));
    println!();
}

fn example_7_private_ranges() {
    println!("Example 7: Private range handling");

    for addr in ["10.1.2.3", "100.64.0.1", "fd00::1", "8.8.8.8", "not-an-ip"] {
        println!("{addr:<12} private: {}", is_private_ip(addr));
    }

    let req = Request::new("GET", "/")
        .with_header("X-Forwarded-For", "10.0.0.1, 192.168.1.3, 172.16.0.9")
        .with_remote_addr("10.0.0.254:443");
    let lenient = IpOptions::new()
        .prefer_forwarded_for(true)
        .return_private_if_all_private(true);
    let strict = lenient.clone().return_private_if_all_private(false);

    println!("All private, lenient -> {}", get_ip_with_options(Some(&req), &lenient));
    println!("All private, strict  -> {}", get_ip_with_options(Some(&req), &strict));
    println!();
}
