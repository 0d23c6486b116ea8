use solana_security_txt::security_txt;

// Deployments replace these with their published repository and contact addresses
security_txt! {
    name: "Token Guard program",
    project_url: "SECURITY.md",
    contacts: "link:SECURITY.md",
    policy: "SECURITY.md"
}
