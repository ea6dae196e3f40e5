use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

pub fn expand_derive(input: &DeriveInput) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    quote! {
        #[automatically_derived]
        impl #impl_generics ::herald_event_bus::Event for #name #ty_generics #where_clause {}
    }
}
