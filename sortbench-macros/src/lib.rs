//! Sortbench Macros
//!
//! Procedural macro for candidate registration.
//!
//! ## Macros
//!
//! - `#[sortbench::candidate]` - Register a `fn(Vec<i64>) -> Vec<i64>` as a sort under test

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemFn, ReturnType, parse_macro_input};

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Register a sorting candidate
///
/// # Example
///
/// ```ignore
/// #[sortbench::candidate(name = "Insertion Sort")]
/// fn insertion_sort(mut v: Vec<i64>) -> Vec<i64> {
///     for i in 1..v.len() {
///         let mut j = i;
///         while j > 0 && v[j - 1] > v[j] {
///             v.swap(j - 1, j);
///             j -= 1;
///         }
///     }
///     v
/// }
///
/// // Without a name, the function identifier is used
/// #[sortbench::candidate]
/// fn std_sort(mut v: Vec<i64>) -> Vec<i64> { v.sort(); v }
/// ```
#[proc_macro_attribute]
pub fn candidate(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let func = parse_macro_input!(item as ItemFn);

    candidate_impl(args, func)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn candidate_impl(args: TokenStream2, func: ItemFn) -> Result<TokenStream2, syn::Error> {
    validate_signature(&func)?;

    let config = parse_candidate_config(args)?;

    let fn_name = &func.sig.ident;
    let fn_name_str = fn_name.to_string();
    let name = config.name.unwrap_or_else(|| fn_name_str.clone());

    if name.trim().is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.ident,
            "Sortbench: candidate name must not be empty",
        ));
    }

    Ok(quote! {
        #func

        ::sortbench::internal::inventory::submit! {
            ::sortbench::CandidateDef {
                name: #name,
                id: #fn_name_str,
                sort_fn: #fn_name,
                file: file!(),
                line: line!(),
                module_path: module_path!(),
            }
        }
    })
}

#[derive(Default)]
struct CandidateConfig {
    name: Option<String>,
}

fn parse_candidate_config(args: TokenStream2) -> Result<CandidateConfig, syn::Error> {
    let mut config = CandidateConfig::default();

    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "name" => config.name = Some(attr::string(&meta)?),
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });

    syn::parse::Parser::parse2(parser, args)?;
    Ok(config)
}

fn validate_signature(func: &ItemFn) -> syn::Result<()> {
    if func.sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            &func.sig,
            "Sortbench: candidates must be synchronous functions",
        ));
    }
    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            "Sortbench: candidates must not be generic",
        ));
    }
    if func.sig.inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            &func.sig,
            "Sortbench: Function must take exactly one argument: `Vec<i64>`",
        ));
    }
    if matches!(func.sig.output, ReturnType::Default) {
        return Err(syn::Error::new_spanned(
            &func.sig,
            "Sortbench: Function must return the sorted `Vec<i64>`",
        ));
    }
    Ok(())
}
