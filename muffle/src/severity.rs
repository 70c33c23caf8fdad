// SPDX-License-Identifier: GPL-3.0-or-later

//! Severity classification for diagnostic categories.
//!
//! Reference for comprehensive warning lists:
//! - Clang: <https://github.com/Barro/compiler-warnings/blob/master/clang/warnings-clang-top-level-8.txt>
//! - GCC: <https://gcc.gnu.org/onlinedocs/gcc/Warning-Options.html>

use std::collections::HashMap;
use std::fmt;

/// Severity of a diagnostic category, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(text)
    }
}

/// Looks up the severity of a diagnostic category.
///
/// Categories with a value suffix like `-Wimplicit-fallthrough=3` fall back
/// to the base category before the `=`. Unknown or empty categories are
/// reported as [`Severity::Medium`].
pub fn classify(category: &str) -> Severity {
    if let Some(severity) = SEVERITY_MAP.get(category) {
        return *severity;
    }
    if let Some((base, _)) = category.split_once('=') {
        if let Some(severity) = SEVERITY_MAP.get(base) {
            return *severity;
        }
    }
    Severity::Medium
}

#[rustfmt::skip]
static SEVERITY_MAP: std::sync::LazyLock<HashMap<&'static str, Severity>> = std::sync::LazyLock::new(|| {
    HashMap::from([
        // Critical - Memory/UB issues
        ("-Wdelete-incomplete", Severity::Critical),
        ("-Wdelete-non-virtual-dtor", Severity::Critical),
        ("-Wuninitialized", Severity::Critical),
        ("-Wreturn-type", Severity::Critical),
        ("-Warray-bounds", Severity::Critical),
        ("-Wdangling-pointer", Severity::Critical),
        ("-Wdangling", Severity::Critical),
        ("-Wdangling-field", Severity::Critical),
        ("-Wdangling-initializer-list", Severity::Critical),
        ("-Wreturn-stack-address", Severity::Critical),
        ("-Wuse-after-free", Severity::Critical),
        ("-Winfinite-recursion", Severity::Critical),
        ("-Wnull-dereference", Severity::Critical),

        // High - Likely bugs
        ("-Wsometimes-uninitialized", Severity::High),
        ("-Wmaybe-uninitialized", Severity::High),
        ("-Wconditional-uninitialized", Severity::High),
        ("-Wsign-compare", Severity::High),
        ("-Wformat", Severity::High),
        ("-Wformat-security", Severity::High),
        ("-Wdivision-by-zero", Severity::High),
        ("-Wshift-overflow", Severity::High),
        ("-Woverflow", Severity::High),
        ("-Wunsequenced", Severity::High),
        ("-Wfor-loop-analysis", Severity::High),
        ("-Wself-assign", Severity::High),
        ("-Wself-assign-field", Severity::High),
        ("-Wself-move", Severity::High),
        ("-Wimplicit-fallthrough", Severity::High),
        ("-Wimplicit-function-declaration", Severity::High),

        // Medium - Code quality
        ("-Wunused-variable", Severity::Medium),
        ("-Wunused-parameter", Severity::Medium),
        ("-Wunused-function", Severity::Medium),
        ("-Wunused-but-set-variable", Severity::Medium),
        ("-Wunused-result", Severity::Medium),
        ("-Wshadow", Severity::Medium),
        ("-Wconversion", Severity::Medium),
        ("-Wdeprecated", Severity::Medium),
        ("-Wdeprecated-declarations", Severity::Medium),
        ("-Wreorder-ctor", Severity::Medium),
        ("-Wreorder", Severity::Medium),
        ("-Wmacro-redefined", Severity::Medium),

        // Low - Style/cosmetic
        ("-Winconsistent-missing-override", Severity::Low),
        ("-Wmissing-braces", Severity::Low),
        ("-Wextra-semi", Severity::Low),
        ("-Wcomma", Severity::Low),
        ("-Wpedantic", Severity::Low),
        ("-Wc++20-extensions", Severity::Low),
        ("-Wc++17-extensions", Severity::Low),
        ("-Wc++14-extensions", Severity::Low),

        // Info
        ("-Wcpp", Severity::Info),
        ("-Wpragmas", Severity::Info),
        ("-W#warnings", Severity::Info),

        // .NET/C# Critical - Nullability & Memory Safety
        ("-WCS8600", Severity::Critical),  // Converting null literal or possible null value to non-nullable type
        ("-WCS8601", Severity::Critical),  // Possible null reference assignment
        ("-WCS8602", Severity::Critical),  // Dereference of a possibly null reference
        ("-WCS8603", Severity::Critical),  // Possible null reference return
        ("-WCS8604", Severity::Critical),  // Possible null reference argument
        ("-WCS8605", Severity::Critical),  // Unboxing a possibly null value
        ("-WCS8625", Severity::Critical),  // Cannot convert null literal to non-nullable reference type
        ("-WCS8618", Severity::Critical),  // Non-nullable field must contain a non-null value when exiting constructor

        // .NET High - Likely bugs
        ("-WCS0162", Severity::High),      // Unreachable code detected
        ("-WCS0219", Severity::High),      // Variable is assigned but its value is never used
        ("-WCS0472", Severity::High),      // Result of expression is always the same
        ("-WCS1717", Severity::High),      // Assignment made to same variable
        ("-WCS8509", Severity::High),      // Switch expression does not handle all possible values
        ("-WCS8524", Severity::High),      // Switch expression does not handle some null inputs
        ("-WCS8073", Severity::High),      // Result of expression is always the same (nullable)

        // .NET Medium - Code quality
        ("-WCS0168", Severity::Medium),    // Variable declared but never used
        ("-WCS0414", Severity::Medium),    // Field assigned but its value never used
        ("-WCS0649", Severity::Medium),    // Field never assigned to, always has default value
        ("-WCS0169", Severity::Medium),    // Field is never used
        ("-WCS1998", Severity::Medium),    // Async method lacks await operators
        ("-WCS8019", Severity::Medium),    // Unnecessary using directive
        ("-WCS8632", Severity::Medium),    // Nullable annotation should only be used in code within '#nullable' context

        // .NET Low - Obsolete APIs & Style
        ("-WSYSLIB0001", Severity::Low),   // Obsolete: UTF7Encoding
        ("-WSYSLIB0011", Severity::Low),   // Obsolete: BinaryFormatter
        ("-WSYSLIB0021", Severity::Low),   // Obsolete: Derived cryptographic types
        ("-WSYSLIB0022", Severity::Low),   // Obsolete: Rijndael and RijndaelManaged
        ("-WSYSLIB0023", Severity::Low),   // Obsolete: RNGCryptoServiceProvider
        ("-WSYSLIB0032", Severity::Low),   // Obsolete: Recovery from corrupted state exceptions
        ("-WSYSLIB0041", Severity::Low),   // Obsolete: Some Rfc2898DeriveBytes constructors
        ("-WSYSLIB0050", Severity::Low),   // Obsolete: Formatter-based serialization
        ("-WSYSLIB0051", Severity::Low),   // Obsolete: Legacy serialization infrastructure
        ("-WSYSLIB0057", Severity::Low),   // Obsolete: X509Certificate constructors
        ("-WCS0618", Severity::Low),       // Type or member is obsolete
        ("-WCS0612", Severity::Low),       // Type or member is obsolete (no message)

        // Code Analysis (CA####)
        ("-WCA1031", Severity::Medium),    // Do not catch general exception types
        ("-WCA1062", Severity::High),      // Validate arguments of public methods
        ("-WCA1304", Severity::Medium),    // Specify CultureInfo
        ("-WCA1305", Severity::Medium),    // Specify IFormatProvider
        ("-WCA1822", Severity::Low),       // Mark members as static
        ("-WCA2007", Severity::Low),       // Do not directly await a Task

        // Roslyn IDE (IDE####)
        ("-WIDE0001", Severity::Low),      // Simplify names
        ("-WIDE0003", Severity::Low),      // Remove this or Me qualification
        ("-WIDE0005", Severity::Low),      // Remove unnecessary using directives

        // Rust critical errors
        ("-WE0308", Severity::Critical),   // Mismatched types
        ("-WE0382", Severity::Critical),   // Use of moved value
        ("-WE0499", Severity::Critical),   // Borrow of moved value

        // Rust warnings
        ("-Wunused-variables", Severity::Medium),
        ("-Wdead-code", Severity::Medium),
    ])
});

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_lookups() {
        assert_eq!(classify("-Wreturn-type"), Severity::Critical);
        assert_eq!(classify("-Wuse-after-free"), Severity::Critical);
        assert_eq!(classify("-Wsign-compare"), Severity::High);
        assert_eq!(classify("-Wunused-variable"), Severity::Medium);
        assert_eq!(classify("-Winconsistent-missing-override"), Severity::Low);
        assert_eq!(classify("-Wcpp"), Severity::Info);
    }

    #[test]
    fn dotnet_lookups() {
        assert_eq!(classify("-WCS8618"), Severity::Critical);
        assert_eq!(classify("-WCS0162"), Severity::High);
        assert_eq!(classify("-WCS0168"), Severity::Medium);
        assert_eq!(classify("-WSYSLIB0057"), Severity::Low);
        assert_eq!(classify("-WCA1062"), Severity::High);
        assert_eq!(classify("-WIDE0001"), Severity::Low);
    }

    #[test]
    fn value_suffix_falls_back_to_base() {
        assert_eq!(classify("-Wimplicit-fallthrough="), Severity::High);
        assert_eq!(classify("-Wimplicit-fallthrough=3"), Severity::High);
        assert_eq!(classify("-Wformat=2"), Severity::High);
    }

    #[test]
    fn unknown_defaults_to_medium() {
        assert_eq!(classify("-Wsomething-nobody-heard-of"), Severity::Medium);
        assert_eq!(classify(""), Severity::Medium);
        assert_eq!(classify("E0308"), Severity::Medium);
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn display_is_uppercase() {
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
        assert_eq!(Severity::Medium.to_string(), "MEDIUM");
    }
}
